use std::io;

use smsup::{MessageSpec, SendOptions, SmsUpClient, SmsUpConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let phone = std::env::var("SMSUP_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSUP_PHONE environment variable is required",
        )
    })?;
    let text = std::env::var("SMSUP_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smsup demo.".to_owned());

    // SMSUP_API_KEY, SMSUP_DEFAULT_FROM, SMSUP_TEST_MODE and the other settings come from the environment.
    let client = SmsUpClient::new(SmsUpConfig::from_env())?;

    let balance = client.get_balance().await?;
    println!("balance before sending: {balance}");

    let result = client
        .send_messages(&[MessageSpec::new(phone, text)], &SendOptions::default())
        .await?;
    println!(
        "status: {}, accepted: {}/{}",
        result.status,
        result.successful_message_count(),
        result.message_count()
    );
    for message in &result.messages {
        println!(
            "  {:?} sms_id={:?} error={:?}",
            message.kind(),
            message.sms_id,
            message.error_message
        );
    }

    Ok(())
}
