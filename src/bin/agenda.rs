use std::path::Path;

use calendar_client::config::ClientConfig;
use calendar_client::storage::FileStorage;
use calendar_client::sync::feedback::feedback_channel;
use calendar_client::utils::lock;
use calendar_client::{Credentials, HttpTransport, SyncService};

const STORAGE_FILE: &str = "agenda_storage.json";


#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ClientConfig::from_env();
    println!("Using the backend at {}", config.base_url);

    let storage = FileStorage::open_or_new(Path::new(STORAGE_FILE));
    let mut service = SyncService::new(HttpTransport::from_config(config), storage);
    let (sender, receiver) = feedback_channel();
    service.set_feedback_channel(sender);

    if service.check_token().await == false {
        let (email, password) = match (std::env::var("CALENDAR_EMAIL"), std::env::var("CALENDAR_PASSWORD")) {
            (Ok(email), Ok(password)) => (email, password),
            _ => {
                log::error!("No valid stored session. Set CALENDAR_EMAIL and CALENDAR_PASSWORD to log in");
                return;
            },
        };
        if service.login(&Credentials::new(email, password)).await == false {
            println!("Unable to log in: {}", *receiver.borrow());
            // Shown once: the message is not meant to stick to the session
            lock(&service.session_store()).clear_error_message();
            log::debug!("Session after the failed login: {}", service.session().status());
            return;
        }
    }

    let user = service.current_user();
    if let Some(user) = &user {
        println!("Logged in as {} ({})", user.name, user.uid);
    }

    if service.load_events().await == false {
        println!("{}", *receiver.borrow());
        return;
    }
    println!("---- Events (* are yours) -----");
    calendar_client::utils::print_event_list(&service.events(), user.as_ref());
}
