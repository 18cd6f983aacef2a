use serde::Deserialize;
use serde_json::{json, Value};

use super::args::parse_args;
use super::{Tool, ToolError, ToolResult};
use crate::store::AppointmentStore;

pub struct CancelTool;

#[derive(Deserialize)]
struct CancelInput {
    customer_name: String,
    appointment_date: String,
}

const REQUIRED: &[&str] = &["customer_name", "appointment_date"];

#[async_trait::async_trait]
impl Tool for CancelTool {
    fn name(&self) -> &str {
        "cancel_appointment"
    }

    fn description(&self) -> &str {
        "Cancels an upcoming appointment. Requires the customer name and the date \
         of the appointment to be canceled."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_name": {
                    "type": "string",
                    "description": "The full name of the customer"
                },
                "appointment_date": {
                    "type": "string",
                    "description": "Date of the appointment to cancel, YYYY-MM-DD"
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
        let input: CancelInput = parse_args(args, REQUIRED)?;
        Ok(ToolResult::Outcome(
            store.cancel(&input.customer_name, &input.appointment_date),
        ))
    }
}
