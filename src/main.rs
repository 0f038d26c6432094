use auth_server::app;
use auth_server::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    app::run().await
}
