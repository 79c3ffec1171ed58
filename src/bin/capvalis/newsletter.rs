use std::fs;

use anyhow::{Context, Result};

use capvalis::signup::SignupForm;
use capvalis::view::newsletter_renderer::{NewsletterRenderer, DEFAULT_TEMPLATE};

use crate::Session;

const TEMPLATE_FILE: &str = "newsletter.html";

fn load_template(session: &Session) -> Result<String> {
    match session.config.paths.template_dir {
        Some(ref dir) => {
            let path = dir.join(TEMPLATE_FILE);
            fs::read_to_string(&path)
                .with_context(|| format!("Error reading template {}", path.display()))
        }
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

pub fn newsletter_cmd(session: &Session, page: u32) -> Result<()> {
    let template = load_template(session)?;
    let renderer = NewsletterRenderer::new(&template)?;

    let mut view = session.newsletter();
    view.mount();

    match view.render(&renderer, page, session.config.defaults.page_size) {
        Ok(html) => println!("{}", html),
        Err(e) => eprintln!("{}", e),
    }
    Ok(())
}

pub fn signup_cmd(email: String, interests: Vec<String>) -> Result<()> {
    let form = SignupForm { email, interests };
    match form.validate() {
        Ok(()) => println!("Thanks for subscribing, {}!", form.email),
        Err(e) => eprintln!("{}", e),
    }
    Ok(())
}
