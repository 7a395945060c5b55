use super::ui;
use crate::core::rate::ConversionResult;
use crate::service::RateService;
use anyhow::Result;
use rust_decimal::Decimal;

fn print_result(result: &ConversionResult) {
    println!(
        "{}",
        ui::style_text(&result.formatted(), ui::StyleType::ResultValue)
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Rate used: 1 {} = {} {}",
                result.source_currency, result.rate_used, result.target_currency
            ),
            ui::StyleType::Subtle
        )
    );
}

/// TWD -> foreign currency, priced at the bank's cash sell rate.
pub async fn from_base(service: &RateService, amount: Decimal, currency: &str) -> Result<()> {
    let result = service.convert_from_base(amount, currency).await?;
    print_result(&result);
    Ok(())
}

/// Foreign currency -> TWD, priced at the bank's cash buy rate.
pub async fn to_base(service: &RateService, amount: Decimal, currency: &str) -> Result<()> {
    let result = service.convert_to_base(amount, currency).await?;
    print_result(&result);
    Ok(())
}
