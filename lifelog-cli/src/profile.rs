use clap::Subcommand;
use colored::Colorize;
use lifelog_lib::{
    client::Client,
    repository::Profile,
    views::{Field, ProfileForm, ProfileView, ViewError, profile::details},
};

use crate::error::CliError;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show your profile
    Show,
    /// Update your profile. Optional fields left out keep their value, pass "" to clear one.
    Edit {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date_of_birth: Option<String>,
        /// M or F
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
}

pub async fn handle(client: Client, cmd: &Command) -> Result<(), CliError> {
    let mut view = ProfileView::new(client);

    match cmd {
        Command::Show => {
            view.load().await?;
        }
        Command::Edit {
            first_name,
            last_name,
            date_of_birth,
            gender,
            location,
        } => {
            let edits = [
                (Field::FirstName, Some(first_name)),
                (Field::LastName, Some(last_name)),
                (Field::DateOfBirth, date_of_birth.as_ref()),
                (Field::Gender, gender.as_ref()),
                (Field::Location, location.as_ref()),
            ];

            // Reject bad input before talking to the server
            let mut form = ProfileForm::default();
            for (field, value) in &edits {
                if let Some(value) = value {
                    form.set(*field, value.as_str());
                }
            }
            form.validate().map_err(ViewError::Invalid)?;

            view.load().await?;
            for (field, value) in edits {
                if let Some(value) = value {
                    view.input(field, value.as_str());
                }
            }

            if view.submit().await? {
                println!("{}", "Profile updated".green());
            } else {
                println!("Nothing to update");
            }
        }
    }

    if let Some(profile) = view.profile() {
        print_profile(profile);
    }

    Ok(())
}

fn print_profile(profile: &Profile) {
    for (label, value) in details(profile) {
        println!("{:>14}  {value}", label.bold());
    }
}
