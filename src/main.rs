#[tokio::main]
async fn main() {
    // run() has already logged the reason.
    if vault_server::run().await.is_err() {
        std::process::exit(1);
    }
}
