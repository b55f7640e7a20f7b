//! Landing Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = landing_backend::run().await {
        eprintln!("landing-backend: {e}");
        std::process::exit(1);
    }
}
