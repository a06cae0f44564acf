//! # Bazaar Storefront Entry Point
//!
//! Runs the storefront demo against the in-memory backend and prints each
//! page view as JSON. The setup lives in lib.rs.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bazaar_storefront::run().await
}
