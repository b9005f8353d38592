use std::{
    error::Error,
    io::{self},
    path::Path,
    process::exit,
    str::FromStr,
};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;

use mandal_ledger::{
    initialize_db,
    models::{NewUser, PasswordHash, Role},
};

/// A utility for adding a user that can log in to the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The new user's display name.
    #[arg(long)]
    name: String,

    /// The new user's email address.
    #[arg(long)]
    email: String,

    /// The new user's role, either 'member' or 'admin'.
    #[arg(long, default_value = "member")]
    role: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    validate_db_path(Path::new(&args.db_path));

    let email = match EmailAddress::from_str(args.email.trim()) {
        Ok(email) => email,
        Err(error) => {
            print_error(format!("'{}' is not a valid email address: {error}", args.email));
            exit(1);
        }
    };

    let role = match Role::from_str(&args.role) {
        Ok(role) => role,
        Err(error) => {
            print_error(error);
            exit(1);
        }
    };

    let password_hash = match get_password_hash() {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };

    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    let user = NewUser {
        name: args.name,
        email,
        password_hash,
        role,
    }
    .insert(&connection)?;

    println!("Added {} {} ({})", user.role.as_str(), user.name, user.email);

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }
}

fn get_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password.is_empty() {
            print_error("The password must not be empty, try again.");
            continue;
        }

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        let password_hash =
            match PasswordHash::from_raw_password(&first_password, PasswordHash::DEFAULT_COST) {
                Ok(password_hash) => password_hash,
                Err(error) => {
                    print_error(format!("Could not hash password: {error}. Try again."));
                    continue;
                }
            };

        return Some(password_hash);
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string())
}
