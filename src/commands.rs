// commands.rs
mod goose;
mod goose_button;
mod reply_with_goose;
mod send_goose;

pub use goose_button::handle_goose_button;

use crate::discord::caller_from;
use crate::error::Error;
use crate::types::Caller;
use crate::Data;

type Context<'a> = poise::Context<'a, Data, Error>;

/// Permissions of the member who ran a slash or context-menu command.
fn invoking_caller(ctx: Context<'_>) -> Caller {
    match ctx {
        poise::Context::Application(app) => {
            caller_from(app.interaction.member.as_ref().and_then(|member| member.permissions))
        }
        _ => Caller::unrestricted(),
    }
}

pub fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        goose::goose(),
        send_goose::sendgoose(),
        goose_button::goosebutton(),
        reply_with_goose::replywithgoose(),
    ]
}
