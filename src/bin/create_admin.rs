//! Create an administrator account, or promote an existing user.
//!
//! Uses the same repository selection as the server (`repository.toml`,
//! `REPOSITORY_TYPE`, `DATABASE_URL`).
//!
//! ```bash
//! cargo run --bin time-control-create-admin -- admin@hitexis.com password123 Admin User
//! ```

use anyhow::Result;
use clap::Parser;

use time_control::db;
use time_control::services::users::{self, AdminSetup, EmployeeCreate};

#[derive(Debug, Parser)]
#[command(name = "time-control-create-admin", about = "Create an admin user")]
struct Args {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = db::init_repository().await?;
    let input = EmployeeCreate {
        email: args.email,
        password: args.password,
        role: Default::default(),
        first_name: args.first_name,
        last_name: args.last_name,
        phone: None,
        bank_account: None,
        position: None,
        department: None,
        work_email: None,
        employment_type: None,
        payment_type: None,
        birthday: None,
    };

    match users::ensure_admin(repo.as_ref(), input).await? {
        AdminSetup::Created(employee) => {
            println!("Admin user created successfully!");
            println!("  Email: {}", employee.user.email);
            println!("  Name: {}", employee.display_name());
            println!("  Role: {}", employee.user.role);
        }
        AdminSetup::Promoted(user) => {
            println!("User {} already existed and is now an active admin", user.email);
        }
        AdminSetup::AlreadyAdmin(user) => {
            println!("User with email {} is already an admin", user.email);
        }
    }
    Ok(())
}
