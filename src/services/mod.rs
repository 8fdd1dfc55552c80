// Service exports
pub mod chat;
pub mod postgres;
pub mod store;
pub mod supabase;

pub use chat::{ChatCompletionClient, ChatPrompt, DescriptionGenerator, EnrichmentError};
pub use postgres::PostgresStore;
pub use store::{StoreError, TeacherStore};
pub use supabase::SupabaseClient;
