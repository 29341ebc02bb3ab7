use chrono::{Local, NaiveDate};
use clap::Subcommand;
use colored::Colorize;
use lifelog_lib::{
    client::Client,
    timebox::{Slot, format_date, parse_date},
    views::TimeBoxView,
};

use crate::error::CliError;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print all 96 slots of a day
    Show {
        /// YYYY-MM-DD, defaults to today
        #[arg(short, long, value_parser = date)]
        date: Option<NaiveDate>,
    },
    /// Describe what you did in a slot
    Set {
        /// Slot start, HH:MM
        slot: Slot,
        description: String,
        #[arg(short, long, value_parser = date)]
        date: Option<NaiveDate>,
    },
    /// Remove the block in a slot
    Clear {
        slot: Slot,
        #[arg(short, long, value_parser = date)]
        date: Option<NaiveDate>,
    },
}

pub async fn handle(client: Client, cmd: &Command) -> Result<(), CliError> {
    match cmd {
        Command::Show { date } => {
            let view = open(client, *date).await?;
            print_day(&view);
        }
        Command::Set {
            slot,
            description,
            date,
        } => {
            let mut view = open(client, *date).await?;

            view.select(*slot);
            view.set_buffer(description.as_str());
            if !view.save().await? {
                return Err(CliError::InvalidInput(
                    "Description must not be blank".to_string(),
                ));
            }

            println!(
                "{} {slot} on {}",
                "Saved".green(),
                format_date(view.date())
            );
        }
        Command::Clear { slot, date } => {
            let mut view = open(client, *date).await?;
            view.delete(*slot).await?;

            println!(
                "{} {slot} on {}",
                "Cleared".green(),
                format_date(view.date())
            );
        }
    }

    Ok(())
}

async fn open(client: Client, date: Option<NaiveDate>) -> Result<TimeBoxView<Client>, CliError> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let mut view = TimeBoxView::new(client, date);
    view.load().await?;

    Ok(view)
}

fn print_day(view: &TimeBoxView<Client>) {
    println!("{}", format_date(view.date()).bold());

    for row in view.rows() {
        match row.description() {
            Some(description) => println!("{}  {description}", row.slot.to_string().cyan()),
            None => println!("{}", row.slot.to_string().dimmed()),
        }
    }
}

fn date(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("`{value}` is not a date, expected YYYY-MM-DD"))
}
