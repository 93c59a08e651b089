//! Currency commands

use crate::cli::args::GlobalOptions;
use crate::cli::progress::with_spinner;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::RateDisplay;
use crate::output::json;

const UNAVAILABLE: &str = "Currency conversion is unavailable";

/// Run the currency rate command
pub async fn rate(opts: &GlobalOptions, code: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let service = ctx.currency()?;
    let rate = with_spinner(ctx.format, "Fetching exchange rate...", service.rate(code)).await?;

    let display = RateDisplay {
        base: service.base().to_string(),
        currency: code.trim().to_uppercase(),
        rate,
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&display)?),
        OutputFormat::Table => match display.rate {
            Some(rate) => {
                let rate = format_amount(rate);
                println!("1 {} = {} {}", display.base, rate, display.currency)
            }
            None => println!("{}", UNAVAILABLE),
        },
    }
    Ok(())
}

/// Run the currency convert command
pub async fn convert(opts: &GlobalOptions, amount: f64, from: &str, to: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let service = ctx.currency()?;
    let converted = with_spinner(
        ctx.format,
        "Converting...",
        service.convert(amount, from, to),
    )
    .await?;

    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "amount": amount,
                "from": from,
                "to": to,
                "converted": converted,
            });
            println!("{}", json::format_json(&json)?);
        }
        OutputFormat::Table => match converted {
            Some(value) => {
                let (amount, value) = (format_amount(amount), format_amount(value));
                println!("{} {} = {} {}", amount, from, value, to)
            }
            None => println!("{}", UNAVAILABLE),
        },
    }
    Ok(())
}

/// Run the currency refresh command
pub fn refresh(opts: &GlobalOptions, code: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.currency()?.clear_cache(code)?;

    let code = code.trim().to_uppercase();
    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "currency": code, "invalidated": true });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => println!("Cached rate for {} cleared", code),
    }
    Ok(())
}

/// Two decimals for money-sized values, more for small rates.
fn format_amount(value: f64) -> String {
    if value != 0.0 && value.abs() < 0.01 {
        format!("{:.6}", value)
    } else if value.fract() == 0.0 {
        format!("{}", value)
    } else {
        format!("{:.2}", value)
    }
}
