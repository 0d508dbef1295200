//! Flatstore CLI
//!
//! Interactive menu over a flatstore data directory: manage doctors and
//! appointments, or run SELECT queries against either table.

use std::io::{self, BufRead, Write};

use clap::Parser;
use flatstore::query;
use flatstore::{Appointment, Config, Doctor, Engine, Result, UpdateOutcome};
use tracing_subscriber::{fmt, EnvFilter};

/// Flatstore CLI
#[derive(Parser, Debug)]
#[command(name = "flatstore-cli")]
#[command(about = "Record-oriented flat-file store for doctors and appointments")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./flatstore_data")]
    data_dir: String,
}

const MENU: &str = "\
1) Add New Doctor
2) Add New Appointment
3) Update Doctor Name (Doctor ID)
4) Update Appointment Date (Appointment ID)
5) Delete Appointment (Appointment ID)
6) Delete Doctor (Doctor ID)
7) Print Doctor Info (Doctor ID)
8) Print Appointment Info (Appointment ID)
9) Write Query
10) Print All Doctors
11) Print All Appointments
0) Exit";

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder().data_dir(&args.data_dir).build();
    let mut engine = match Engine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    println!("Welcome to the flatstore clinic demo (v{})", flatstore::VERSION);
    println!("Data directory: {}", args.data_dir);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!("\n{}", MENU);
        let choice = match prompt(&mut input, "Enter a choice: ") {
            Some(choice) => choice,
            None => break,
        };

        let done = match choice.as_str() {
            "0" => true,
            "1" => run(add_doctor(&mut engine, &mut input)),
            "2" => run(add_appointment(&mut engine, &mut input)),
            "3" => run(update_doctor_name(&mut engine, &mut input)),
            "4" => run(update_appointment_date(&mut engine, &mut input)),
            "5" => run(delete_appointment(&mut engine, &mut input)),
            "6" => run(delete_doctor(&mut engine, &mut input)),
            "7" => run(print_doctor(&engine, &mut input)),
            "8" => run(print_appointment(&engine, &mut input)),
            "9" => run(run_query(&engine, &mut input)),
            "10" => run(print_all_doctors(&engine)),
            "11" => run(print_all_appointments(&engine)),
            other => {
                println!("Unknown choice: {}", other);
                false
            }
        };
        if done {
            break;
        }
    }

    println!("Goodbye.");
}

/// Report an operation's error, if any; never exits the loop
fn run(result: Result<()>) -> bool {
    if let Err(e) = result {
        println!("Error: {}", e);
    }
    false
}

/// Read one trimmed line; `None` on EOF
fn prompt(input: &mut impl BufRead, message: &str) -> Option<String> {
    print!("{}", message);
    let _ = io::stdout().flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

fn prompt_or_abort(input: &mut impl BufRead, message: &str) -> Result<String> {
    prompt(input, message)
        .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into())
}

// =============================================================================
// Menu Actions
// =============================================================================

fn add_doctor(engine: &mut Engine, input: &mut impl BufRead) -> Result<()> {
    let name = prompt_or_abort(input, "Name: ")?;
    let address = prompt_or_abort(input, "Address: ")?;
    let id = engine.add_doctor(&name, &address)?;
    println!("Doctor {} is added with ID {}", name, id);
    Ok(())
}

fn add_appointment(engine: &mut Engine, input: &mut impl BufRead) -> Result<()> {
    let date = prompt_or_abort(input, "Date: ")?;
    let doctor_id = prompt_or_abort(input, "Doctor ID: ")?;
    let id = engine.add_appointment(&date, &doctor_id)?;
    println!("Appointment with ID {} has been added", id);
    Ok(())
}

fn update_doctor_name(engine: &mut Engine, input: &mut impl BufRead) -> Result<()> {
    let id = prompt_or_abort(input, "Doctor ID: ")?;
    let name = prompt_or_abort(input, "New name: ")?;
    match engine.update_doctor_name(&id, &name)? {
        UpdateOutcome::InPlace => println!("Doctor's name updated successfully"),
        UpdateOutcome::Reinserted { new_id } => {
            println!("Record outgrew its slot; doctor re-added under ID {}", new_id)
        }
    }
    Ok(())
}

fn update_appointment_date(engine: &mut Engine, input: &mut impl BufRead) -> Result<()> {
    let id = prompt_or_abort(input, "Appointment ID: ")?;
    let date = prompt_or_abort(input, "New date: ")?;
    match engine.update_appointment_date(&id, &date)? {
        UpdateOutcome::InPlace => println!("Appointment date updated successfully"),
        UpdateOutcome::Reinserted { new_id } => {
            println!("Record outgrew its slot; appointment re-added under ID {}", new_id)
        }
    }
    Ok(())
}

fn delete_appointment(engine: &mut Engine, input: &mut impl BufRead) -> Result<()> {
    let id = prompt_or_abort(input, "Appointment ID: ")?;
    engine.delete_appointment(&id)?;
    println!("Appointment with ID {} has been marked as deleted", id);
    Ok(())
}

fn delete_doctor(engine: &mut Engine, input: &mut impl BufRead) -> Result<()> {
    let id = prompt_or_abort(input, "Doctor ID: ")?;
    engine.delete_doctor(&id)?;
    println!("Doctor with ID {} has been marked as deleted", id);
    Ok(())
}

fn print_doctor(engine: &Engine, input: &mut impl BufRead) -> Result<()> {
    let id = prompt_or_abort(input, "Doctor ID: ")?;
    print_doctor_row(&engine.doctor_by_id(&id)?);
    Ok(())
}

fn print_appointment(engine: &Engine, input: &mut impl BufRead) -> Result<()> {
    let id = prompt_or_abort(input, "Appointment ID: ")?;
    print_appointment_row(&engine.appointment_by_id(&id)?);
    Ok(())
}

fn print_all_doctors(engine: &Engine) -> Result<()> {
    let doctors = engine.all_doctors()?;
    if doctors.is_empty() {
        println!("No doctors on file");
    }
    for doctor in &doctors {
        print_doctor_row(doctor);
    }
    Ok(())
}

fn print_all_appointments(engine: &Engine) -> Result<()> {
    let appointments = engine.all_appointments()?;
    if appointments.is_empty() {
        println!("No appointments on file");
    }
    for appointment in &appointments {
        print_appointment_row(appointment);
    }
    Ok(())
}

fn run_query(engine: &Engine, input: &mut impl BufRead) -> Result<()> {
    let text = prompt_or_abort(input, "Enter your query: ")?;
    let parsed = query::parse(&text)?;
    let output = query::execute(engine, &parsed)?;

    println!("{}", output.columns.join(" | "));
    if output.rows.is_empty() {
        println!("(no rows)");
    }
    for row in &output.rows {
        println!("{}", row.join(" | "));
    }
    Ok(())
}

fn print_doctor_row(doctor: &Doctor) {
    println!(
        "ID: {} | Name: {} | Address: {}",
        doctor.id, doctor.name, doctor.address
    );
}

fn print_appointment_row(appointment: &Appointment) {
    println!(
        "ID: {} | Date: {} | Doctor ID: {}",
        appointment.id, appointment.date, appointment.doctor_id
    );
}
