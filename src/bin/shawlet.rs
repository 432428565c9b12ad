use std::{process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand, ValueEnum};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::filter::LevelFilter;

use shawlet::{
    FinancialRecord, RecordField, RecordId, UserId,
    client::{ClientConfig, ClientResult, RecordContext, RecordDraft, Session, StaticIdentity},
};

/// Manage your Shawlet records from the command line.
///
/// Reads SHAWLET_PUBLISHABLE_KEY and SHAWLET_API_URL from the environment.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The ID of the signed-in user.
    #[arg(long, global = true, env = "SHAWLET_USER_ID")]
    user_id: Option<String>,

    /// The session token issued to the user by the identity provider.
    #[arg(long, global = true, env = "SHAWLET_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn session(&self) -> Option<Session> {
        match (&self.user_id, &self.session_token) {
            (Some(user_id), Some(token)) => Some(Session {
                user_id: UserId::new(user_id.as_str()),
                token: token.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List your records.
    List,
    /// Add a record.
    Add {
        /// What the record was for.
        #[arg(long)]
        description: String,
        /// The amount of money earned or spent.
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// E.g. "Food" or "Salary". "Salary" and "Part Time Job" count as income.
        #[arg(long)]
        category: String,
        /// E.g. "Cash" or "Credit Card".
        #[arg(long)]
        payment_method: String,
        /// When it happened as an RFC 3339 date-time, defaults to now.
        #[arg(long, value_parser = parse_date)]
        date: Option<OffsetDateTime>,
        /// An optional currency tag, e.g. "NZD".
        #[arg(long)]
        currency: Option<String>,
    },
    /// Change one field of a record.
    Edit {
        /// The ID of the record.
        id: RecordId,
        /// The field to change.
        field: FieldArg,
        /// The new value.
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Delete a record.
    Delete {
        /// The ID of the record.
        id: RecordId,
    },
    /// Show total income, total expenses and the net balance.
    Summary,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FieldArg {
    Description,
    Amount,
    Category,
    PaymentMethod,
}

impl From<FieldArg> for RecordField {
    fn from(value: FieldArg) -> Self {
        match value {
            FieldArg::Description => RecordField::Description,
            FieldArg::Amount => RecordField::Amount,
            FieldArg::Category => RecordField::Category,
            FieldArg::PaymentMethod => RecordField::PaymentMethod,
        }
    }
}

fn parse_date(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(text, &Rfc3339)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(LevelFilter::WARN)
        .init();

    let args = Args::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let context = RecordContext::new(&config, Arc::new(StaticIdentity::new(args.session())));

    match run(args.command, &context).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, context: &RecordContext<StaticIdentity>) -> ClientResult<()> {
    context.sync_session().await?;

    match command {
        Command::List => {
            for record in context.records() {
                print_record(&record);
            }
        }
        Command::Add {
            description,
            amount,
            category,
            payment_method,
            date,
            currency,
        } => {
            let draft = RecordDraft {
                date: date.unwrap_or_else(OffsetDateTime::now_utc),
                description,
                amount,
                category,
                payment_method,
                currency,
            };
            print_record(&context.add_record(draft).await?);
        }
        Command::Edit { id, field, value } => {
            print_record(&context.update_field(id, field.into(), &value).await?);
        }
        Command::Delete { id } => {
            let deleted = context.delete_record(id).await?;
            println!("Deleted record {}", deleted.id);
        }
        Command::Summary => {
            let totals = context.summary();
            println!("Total Income:   {:.2}", totals.income);
            println!("Total Expenses: {:.2}", totals.expense);
            println!("Net Balance:    {:.2}", totals.net);
        }
    }

    Ok(())
}

fn print_record(record: &FinancialRecord) {
    let date = record
        .date
        .format(&Rfc3339)
        .unwrap_or_else(|_| record.date.to_string());

    println!(
        "{}\t{date}\t{:.2}{}\t{}\t{}\t{}",
        record.id,
        record.amount,
        record
            .currency
            .as_deref()
            .map(|currency| format!(" {currency}"))
            .unwrap_or_default(),
        record.category,
        record.payment_method,
        record.description
    );
}
