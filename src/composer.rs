use crate::config::Branding;
use crate::manifest::BuildInfo;
use crate::telegram::{InlineButton, InlineKeyboard};

const BUTTONS_PER_ROW: usize = 2;

/// Escape text for Telegram's HTML parse mode (also safe inside quoted attributes).
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn expand(template: &str, codename: &str) -> String {
    template.replace("{codename}", codename)
}

pub fn caption(info: &BuildInfo, brand: &Branding) -> String {
    let e = escape_html;
    let mut msg = String::new();
    msg += &format!(
        "<b>{} {} // {} {} ({})</b>\n\n",
        e(&brand.rom_name),
        e(&brand.edition),
        e(&info.oem),
        e(&info.device_name),
        e(&info.codename),
    );
    msg += &format!("<b>Build Date:</b> <code>{} UTC</code>\n", e(&info.build_date));
    msg += &format!(
        "<b>Maintainer:</b> <a href='{}{}'>{}</a>\n",
        e(&brand.maintainer_profile_base),
        e(&info.maintainer),
        e(&info.maintainer),
    );
    msg += &format!("<b>Screenshots:</b> <a href='{}'>Here</a>\n", e(&brand.screenshots_url));
    msg += &format!(
        "<b>Support:</b> <a href='{}'>Channel</a> <b>|</b> <a href='{}'>Group</a>\n",
        e(&brand.announcements_url),
        e(&brand.support_group_url),
    );
    msg += &format!(
        "\n#{} #{} #{} #Official",
        e(&brand.edition),
        e(&info.codename),
        e(&brand.android_tag),
    );
    msg
}

pub fn buttons(info: &BuildInfo, brand: &Branding) -> InlineKeyboard {
    let buttons = vec![
        InlineButton::new("Download", info.download.as_str()),
        InlineButton::new("Installation", expand(&brand.installation_url, &info.codename)),
        InlineButton::new("Rom Changelogs", expand(&brand.changelog_url, &info.codename)),
        InlineButton::new("Release Notes", expand(&brand.release_notes_url, &info.codename)),
        InlineButton::new("Telegram", info.telegram.as_str()),
    ];
    InlineKeyboard::from_buttons(buttons, BUTTONS_PER_ROW)
}
