use clap::Parser;
use shared::{MedicationCardResponse, PendingMedication, PendingMedicationsResponse};
use std::path::PathBuf;

/// Show which medications are due for each child.
///
/// Reads a household snapshot exported by the record layer and prints the
/// medication card of every child, or of a single child.
#[derive(Parser, Debug)]
#[command(name = "medication-due", about = "Show pending medications per child")]
pub struct CliArgs {
    /// Household snapshot (YAML) with children, schedules and doses
    #[arg(long, env = "MEDICATION_DATA")]
    pub data: PathBuf,

    /// Engine settings file (YAML); defaults apply when missing
    #[arg(long, env = "MEDICATION_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Only show this child (overrides the configured default child)
    #[arg(long)]
    pub child: Option<String>,

    /// Evaluation time as RFC 3339 (uses the current time if not set)
    #[arg(long)]
    pub now: Option<String>,

    /// Only list pending medications instead of the full card
    #[arg(long)]
    pub pending: bool,

    /// Print the output as JSON
    #[arg(long)]
    pub json: bool,
}

fn render_pending_entry(entry: &PendingMedication) -> String {
    let marker = if entry.overdue { " [OVERDUE]" } else { "" };
    format!(
        "  {} ({}) due {}{}\n",
        entry.schedule.name, entry.schedule.frequency_label, entry.next_due_time, marker
    )
}

/// Plain text rendering of a medication card
pub fn render_card(card: &MedicationCardResponse) -> String {
    let mut out = format!("{} ({})\n", card.child.name, card.child.id);

    if card.empty {
        out.push_str("  No medications logged or due\n");
        return out;
    }

    if let Some(dose) = &card.last_dose {
        out.push_str(&format!("  Last dose: {} at {}\n", dose.name, dose.time));
    }

    if card.pending.is_empty() {
        out.push_str("  Nothing due\n");
    }
    for entry in &card.pending {
        out.push_str(&render_pending_entry(entry));
    }

    let overdue = card.overdue_count();
    if overdue > 0 {
        out.push_str(&format!("  {} of {} overdue\n", overdue, card.pending.len()));
    }
    out
}

/// Plain text rendering of a child's pending list
pub fn render_pending(response: &PendingMedicationsResponse) -> String {
    let mut out = format!("{}: {} pending\n", response.child_id, response.pending.len());
    for entry in &response.pending {
        out.push_str(&render_pending_entry(entry));
    }
    out
}
