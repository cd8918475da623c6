use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(error) = subscription_tracker::run().await {
        error!("Server exited with error: {:#}", error);
        eprintln!("Server exited with error: {:#}", error);
        std::process::exit(1);
    }
}
