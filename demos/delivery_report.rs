use std::io::{self, Read};

use smsup::parse_delivery_reports;

/// Reads a delivery-report webhook body from stdin and prints each record.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;

    for report in parse_delivery_reports(&body)? {
        println!(
            "{} {} -> {}: {:?} (custom={:?})",
            report.sms_id,
            report.from,
            report.to,
            report.kind(),
            report.custom
        );
    }
    Ok(())
}
