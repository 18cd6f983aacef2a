use serde::Deserialize;
use serde_json::{json, Value};

use super::args::parse_args;
use super::{Tool, ToolError, ToolResult};
use crate::store::AppointmentStore;

pub struct RescheduleTool;

#[derive(Deserialize)]
struct RescheduleInput {
    customer_name: String,
    original_date: String,
    new_date: String,
    new_time: String,
}

const REQUIRED: &[&str] = &["customer_name", "original_date", "new_date", "new_time"];

#[async_trait::async_trait]
impl Tool for RescheduleTool {
    fn name(&self) -> &str {
        "reschedule_appointment"
    }

    fn description(&self) -> &str {
        "Reschedules an existing appointment. Requires the customer name and the \
         original appointment date to find the correct one."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_name": {
                    "type": "string",
                    "description": "The full name of the customer"
                },
                "original_date": {
                    "type": "string",
                    "description": "Date of the existing appointment, YYYY-MM-DD"
                },
                "new_date": {
                    "type": "string",
                    "description": "New date for the appointment, YYYY-MM-DD"
                },
                "new_time": {
                    "type": "string",
                    "description": "New time for the appointment, e.g. 11:00 AM"
                }
            },
            "required": REQUIRED
        })
    }

    async fn execute(
        &self,
        store: &mut AppointmentStore,
        args: &Value,
    ) -> Result<ToolResult, ToolError> {
        let input: RescheduleInput = parse_args(args, REQUIRED)?;
        Ok(ToolResult::Outcome(store.reschedule(
            &input.customer_name,
            &input.original_date,
            &input.new_date,
            &input.new_time,
        )))
    }
}
