//! Read-only owner dashboard: a table of every live appointment.

use colored::Colorize;

use crate::store::Appointment;

/// Column headers, in display order.
const HEADERS: [&str; 6] = ["ID", "CUSTOMER", "SERVICE", "STYLIST", "DATE", "TIME"];

/// Prints all appointments as a table sized to the terminal.
pub fn print_appointments(appointments: &[Appointment]) {
    if appointments.is_empty() {
        println!("{}", "No appointments booked.".dimmed());
        return;
    }

    let term_width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80);
    let widths = column_widths(appointments);

    let header = pad_row(&HEADERS.map(String::from), &widths);
    println!("{}", header.bold());
    println!("{}", "-".repeat(term_width.min(header.chars().count())));

    for appt in appointments {
        // Pad first, then colorize to avoid ANSI escape code width issues
        let cells = row(appt);
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        println!(
            "{}  {}  {}  {}  {}  {}",
            padded[0].cyan(),
            padded[1],
            padded[2],
            padded[3].dimmed(),
            padded[4].yellow(),
            padded[5].yellow(),
        );
    }
    println!();
    println!("{} {} appointments", "total:".dimmed(), appointments.len());
}

fn row(appt: &Appointment) -> [String; 6] {
    [
        appt.id.to_string(),
        appt.customer_name.clone(),
        appt.service.clone(),
        appt.stylist.clone(),
        appt.date.clone(),
        appt.time.clone(),
    ]
}

fn column_widths(appointments: &[Appointment]) -> [usize; 6] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for appt in appointments {
        for (w, cell) in widths.iter_mut().zip(row(appt).iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

fn pad_row(cells: &[String; 6], widths: &[usize; 6]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<w$}", c, w = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
