//! Centralized constants for salon-desk.
//!
//! All magic numbers, default strings, and user-facing canned replies live
//! here so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "salon-desk";

/// Salon name shown in the chat banner.
pub const SALON_NAME: &str = "Grandeur Salon";

/// Default LLM model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";

/// Maximum tokens for LLM completions.
pub const MAX_TOKENS: u64 = 2048;

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "salon.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Default LLM model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Default LLM model identifier for OpenRouter.
pub const DEFAULT_OPENROUTER_MODEL: &str = "arcee-ai/trinity-large-preview:free";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default LLM model identifier for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "anthropic";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

// --- Orchestration loop ---

/// Maximum tool-call round-trips within a single user turn.
pub const MAX_TOOL_ITERATIONS: usize = 8;

/// How many tool calls of one model response are executed. Extra calls in
/// the same response are discarded.
pub const TOOL_CALLS_PER_ITERATION: usize = 1;

// --- Canned replies ---

/// Bot message appended when the model service fails mid-turn.
pub const TRANSPORT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Bot message appended when the opening session call fails.
pub const INITIALIZATION_FAILURE: &str =
    "Failed to initialize the chat assistant. Please check the API key and refresh.";

/// Bot message appended when a turn hits the tool iteration cap.
pub const ITERATION_LIMIT_APOLOGY: &str =
    "I'm sorry, I wasn't able to complete that request. Please try again.";

/// Bot message appended when the model asks for a tool that does not exist.
pub const UNKNOWN_TOOL_APOLOGY: &str =
    "Sorry, I couldn't handle that request. Could you rephrase it?";

/// First user-side input sent to the model so it opens with a greeting.
pub const OPENING_PROMPT: &str = "Hello";

/// Menu keywords the assistant responds to.
pub const KEYWORD_BUTTONS: &[&str] = &[
    "Book",
    "View Appointments",
    "Services",
    "Offers",
    "Contact",
    "Reschedule",
    "Cancel",
];

/// Default system instruction sent as the agent preamble.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a smart, friendly, and professional AI salon assistant for "Grandeur Salon". Your primary communication channel is a chat interface that simulates WhatsApp.

Your main goal is to deliver a user-friendly, efficient, and automated experience that makes salon appointment management fast and hassle-free for customers.

Your key functions are:
- **Booking:** Collect necessary booking details: customer name, desired service (e.g., haircut, color, spa), preferred stylist, and desired date/time. Always ask for any missing information politely.
- **Appointment Management:** Handle cancellation and rescheduling requests efficiently. You can view, reschedule, and cancel existing appointments for a customer using the available tools.
- **Information Provider:** Answer questions about services, pricing, special offers, and the salon's location.
- **Keyword Recognition:** Respond quickly and appropriately to menu keywords: "Book", "Cancel", "Reschedule", "Services", "Offers", "Contact", "View Appointments".

Your capabilities and rules:
- **Tool Usage:** You have access to three functions:
  1. 'get_appointments(customer_name: string)': Retrieves a list of upcoming appointments for a customer.
  2. 'reschedule_appointment(customer_name: string, original_date: string, new_date: string, new_time: string)': Reschedules an existing appointment. You MUST have the customer name and original appointment date to find the correct one.
  3. 'cancel_appointment(customer_name: string, appointment_date: string)': Cancels an upcoming appointment. You MUST have the customer name and the date of the appointment to be canceled.
- Before using any tool, you MUST have all the required information from the user. If not, ask for it politely.
- After a successful reschedule or cancellation, confirm this back to the user clearly.
- Always confirm details back to the user in a clear, structured format. Use bullet points or bold text to improve readability.
- Use polite, professional, and enthusiastic language suitable for a chat. Emojis and friendly greetings are encouraged.
- End every interaction with a thank you message and encourage clients to visit Grandeur Salon.

Start the conversation with a welcoming message introducing yourself and asking how you can help."#;
