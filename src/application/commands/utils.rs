use serenity::all::{CommandDataOption, CommandDataOptionValue};

/// Extract a string option from a slash command by index.
pub fn get_string_option(options: &[CommandDataOption], index: usize) -> Option<String> {
    options.get(index).and_then(|opt| {
        if let CommandDataOptionValue::String(s) = &opt.value {
            Some(s.clone())
        } else {
            None
        }
    })
}

pub fn get_integer_option(options: &[CommandDataOption], index: usize) -> Option<i64> {
    options.get(index).and_then(|opt| {
        if let CommandDataOptionValue::Integer(v) = opt.value {
            Some(v)
        } else {
            None
        }
    })
}

pub fn get_user_option(options: &[CommandDataOption], index: usize) -> Option<u64> {
    options.get(index).and_then(|opt| {
        if let CommandDataOptionValue::User(id) = opt.value {
            Some(id.get())
        } else {
            None
        }
    })
}
