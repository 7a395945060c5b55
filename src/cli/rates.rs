use super::ui;
use crate::core::currency::CurrencyCode;
use crate::core::rate::ExchangeRateSnapshot;
use crate::core::time::{format_chinese_datetime, to_taiwan_time};
use crate::service::RateService;
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;

impl ExchangeRateSnapshot {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Name"),
            ui::header_cell("Cash Buy"),
            ui::header_cell("Cash Sell"),
        ]);

        for rate in self.rates() {
            let name = rate
                .currency_code
                .parse::<CurrencyCode>()
                .map_or(rate.currency_name.as_str(), |code| code.display_name());
            table.add_row(vec![
                Cell::new(&rate.currency_code),
                Cell::new(name),
                ui::number_cell(rate.cash_buy_rate.to_string()),
                ui::number_cell(rate.cash_sell_rate.to_string()),
            ]);
        }

        let mut output = format!(
            "Exchange rates: {}\n\n",
            ui::style_text(self.source(), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\nFetched at: {}",
            ui::style_text(
                &format_chinese_datetime(&self.fetched_at()),
                ui::StyleType::Subtle
            )
        ));
        if self.is_stale() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    "Rates are older than 24 hours, run `twfx refresh` to update them",
                    ui::StyleType::Warning
                )
            ));
        }
        output
    }
}

pub async fn show(service: &RateService) -> Result<()> {
    match service.current_snapshot().await? {
        Some(snapshot) => {
            println!("{}", snapshot.display_as_table());
            if let Some(stored_at) = service.stored_at().await {
                let stored_at = to_taiwan_time(stored_at.with_timezone(&Utc));
                println!(
                    "Stored at: {}",
                    ui::style_text(&format_chinese_datetime(&stored_at), ui::StyleType::Subtle)
                );
            }
        }
        None => println!(
            "{}",
            ui::style_text(
                "No exchange rate data yet, run `twfx refresh` to fetch it",
                ui::StyleType::Warning
            )
        ),
    }
    Ok(())
}

pub async fn refresh(service: &RateService) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let result = service.refresh().await;
    pb.finish_and_clear();

    let snapshot = result?;
    println!(
        "Updated {} exchange rates",
        ui::style_text(&snapshot.rates().len().to_string(), ui::StyleType::ResultValue)
    );
    println!("{}", snapshot.display_as_table());
    Ok(())
}
