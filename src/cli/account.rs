use crate::actions;
use crate::cli::event_log;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn login(name: &str) -> Result<()> {
    let mut settings = load_settings();
    let analytics = event_log(&settings);
    actions::sign_in(&mut settings, name, analytics.as_ref())?;
    save_settings(&settings)?;
    println!("Signed in as {}", settings.user_name);
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut settings = load_settings();
    let analytics = event_log(&settings);
    if actions::sign_out(&mut settings, analytics.as_ref()) {
        save_settings(&settings)?;
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}
