//! End-to-end walkthrough: claim credits, create an inbox, wait for a
//! message, then clean up.
//!
//! Usage: NULZ_API_KEY=nlz_live_xxx cargo run --example demo

use nulz_mail_client::{Client, CreateInboxOptions, ListOptions, WaitOptions};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("NULZ_API_KEY").expect("set NULZ_API_KEY");
    let client = Client::new(api_key)?;

    if let Err(err) = client.claim_free_credits().await {
        println!("Free claim not available: {err}");
    }
    let credits = client.credits().await?;
    println!("Credits: {}", credits.credits_balance);

    // When the account is at its alias limit, fall back to an existing
    // active inbox instead of giving up.
    let (inbox_id, reused) = match client.create_inbox(CreateInboxOptions::default()).await {
        Ok(created) => {
            println!("Created: {}", created.address);
            (Some(created.id), false)
        }
        Err(err) => {
            println!("Create failed: {err}");
            let page = client
                .list_inboxes(ListOptions {
                    limit: Some(50),
                    offset: None,
                })
                .await?;
            match page.aliases.into_iter().find(|inbox| inbox.active) {
                Some(inbox) => {
                    println!("Reusing: {}", inbox.address);
                    (Some(inbox.id), true)
                }
                None => (None, false),
            }
        }
    };

    let Some(inbox_id) = inbox_id else {
        println!("No inbox available");
        return Ok(());
    };

    println!("Waiting up to 60s for a message...");
    let wait = WaitOptions {
        timeout: Duration::from_secs(60),
        poll_interval: Duration::from_secs(2),
    };
    match client.wait_for_message(&inbox_id, wait).await? {
        Some(message) => {
            println!("From: {}, Subject: {}", message.from_addr, message.subject);
            if let Some(code) = client.get_message_code(&message.id).await? {
                println!("Code: {code}");
            }
        }
        None => println!("No message arrived"),
    }

    if !reused {
        client.delete_inbox(&inbox_id).await?;
        println!("Inbox deleted");
    }
    Ok(())
}
