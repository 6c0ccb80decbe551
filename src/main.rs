#[tokio::main]
async fn main() {
    therapy_booking_backend::run().await;
}
