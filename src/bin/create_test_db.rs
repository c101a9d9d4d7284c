use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use cashflow_admin::{
    Amount, CategoryKind, EntityName, StatusKind, Transaction, TransactionTypeKind,
    create_reference, create_subcategory, create_transaction, initialize_db,
};

/// A utility for creating a database with sample cash-flow data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of sample transactions to create.
    #[arg(long, short, default_value_t = 120)]
    transaction_count: u32,
}

const STATUSES: [&str; 3] = ["Business", "Personal", "Tax"];
const TYPES: [&str; 2] = ["Income", "Expense"];
const CATEGORIES: [(&str, &[&str]); 4] = [
    ("Marketing", &["Avito", "Farpost", "Contextual ads"]),
    ("Infrastructure", &["VPS", "Proxy", "Domains"]),
    ("Sales", &["Wholesale", "Retail"]),
    ("Office", &["Rent", "Supplies"]),
];
const COMMENTS: [&str; 5] = [
    "",
    "Monthly payment",
    "Paid by card",
    "Invoice settled after a reminder from the supplier about the overdue balance",
    "Перевод по договору",
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating statuses, types and categories...");

    let statuses = STATUSES
        .iter()
        .map(|name| create_reference::<StatusKind>(EntityName::new(name)?, &conn))
        .collect::<Result<Vec<_>, _>>()?;
    let types = TYPES
        .iter()
        .map(|name| create_reference::<TransactionTypeKind>(EntityName::new(name)?, &conn))
        .collect::<Result<Vec<_>, _>>()?;

    let mut subcategories = Vec::new();
    for (category_name, subcategory_names) in CATEGORIES {
        let category = create_reference::<CategoryKind>(EntityName::new(category_name)?, &conn)?;

        for name in subcategory_names {
            subcategories.push(create_subcategory(EntityName::new(name)?, category.id, &conn)?);
        }
    }

    println!("Creating {} transactions...", args.transaction_count);

    let today = OffsetDateTime::now_utc().date();

    for i in 0..args.transaction_count {
        let index = i as usize;
        let subcategory = &subcategories[index * 7 % subcategories.len()];
        // Spread the amounts over every filter bucket, from a few roubles to tens of thousands.
        let kopecks = (i64::from(i) * 7919 % 97 + 1) * 10_i64.pow(i % 5 + 2);
        let builder = Transaction::build(
            statuses[index % statuses.len()].id,
            types[index % 3 % types.len()].id,
            subcategory.category_id,
            subcategory.id,
            Amount::from_minor_units(kopecks),
        )
        .created_at(Some(today - Duration::days(i64::from(i) * 3)))
        .comment(COMMENTS[index % COMMENTS.len()]);

        create_transaction(builder, today, &conn)?;
    }

    println!("Success!");

    Ok(())
}
