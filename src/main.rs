#[tokio::main]
async fn main() {
    if let Err(err) = bikeviz::run().await {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
