use serde::Deserialize;
use serde_json::{json, Value};

use super::args::parse_args;
use super::{Tool, ToolError, ToolResult};
use crate::store::AppointmentStore;

pub struct GetAppointmentsTool;

#[derive(Deserialize)]
struct GetAppointmentsInput {
    customer_name: String,
}

#[async_trait::async_trait]
impl Tool for GetAppointmentsTool {
    fn name(&self) -> &str {
        "get_appointments"
    }

    fn description(&self) -> &str {
        "Retrieves a list of upcoming appointments for a customer."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_name": {
                    "type": "string",
                    "description": "The full name of the customer"
                }
            },
            "required": ["customer_name"]
        })
    }

    async fn execute(
        &self,
        store: &mut AppointmentStore,
        args: &Value,
    ) -> Result<ToolResult, ToolError> {
        let input: GetAppointmentsInput = parse_args(args, &["customer_name"])?;
        Ok(ToolResult::Appointments(store.query(&input.customer_name)))
    }
}
