//! Dark theme stylesheet and image borders.

use crate::config::SiteProfile;
use crate::model::page::Page;
use shared::dto::settings::Settings;

/// Link or unlink the dark stylesheet.
///
/// `stylesheet_url` is the resolved location of the profile's dark
/// stylesheet. The link is only written when it changes, so the browser does
/// not reload an already applied sheet. Returns whether the page changed.
pub fn apply_dark_mode<P: Page>(page: &mut P, stylesheet_url: &str, enabled: bool) -> bool {
    let current = page.stylesheet_href();
    if enabled && current != stylesheet_url {
        page.set_stylesheet_href(stylesheet_url);
        true
    } else if !enabled && !current.is_empty() {
        page.set_stylesheet_href("");
        true
    } else {
        false
    }
}

/// CSS rule drawing the configured border around product images.
pub fn border_rule(profile: &SiteProfile, settings: &Settings) -> String {
    format!(
        "{} {{ border: {}px {} {} }}",
        profile.image_selectors.join(", "),
        settings.border_width,
        settings.border_style,
        settings.border_color
    )
}

/// Drop the border rule and re-insert it when borders are enabled.
pub fn apply_borders<P: Page>(page: &mut P, profile: &SiteProfile, settings: &Settings) {
    if page.style_rule().is_some() {
        page.set_style_rule(None);
    }
    if settings.enable_border {
        page.set_style_rule(Some(&border_rule(profile, settings)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::page::Document;

    #[test]
    fn test_dark_mode_writes_only_on_change() {
        let mut doc = Document::new("/");
        assert!(!apply_dark_mode(&mut doc, "dark.css", false));
        assert!(apply_dark_mode(&mut doc, "dark.css", true));
        assert!(!apply_dark_mode(&mut doc, "dark.css", true));
        assert_eq!(doc.stylesheet_href(), "dark.css");

        assert!(apply_dark_mode(&mut doc, "dark.css", false));
        assert_eq!(doc.stylesheet_href(), "");
    }

    #[test]
    fn test_border_rule_text() {
        let settings = Settings::install_defaults();
        assert_eq!(
            border_rule(&SiteProfile::default(), &settings),
            ".image > img, .tns-item > a > img, tr > .xx > .flex > img { border: 5px solid red }"
        );
    }

    #[test]
    fn test_borders_follow_settings() {
        let mut doc = Document::new("/");
        let profile = SiteProfile::default();
        let mut settings = Settings {
            enable_border: true,
            border_width: 2,
            border_style: "dashed".to_string(),
            border_color: "#fff".to_string(),
            ..Settings::default()
        };

        apply_borders(&mut doc, &profile, &settings);
        assert!(doc.style_rule().unwrap().ends_with("{ border: 2px dashed #fff }"));

        settings.border_width = 7;
        apply_borders(&mut doc, &profile, &settings);
        assert!(doc.style_rule().unwrap().contains("7px"));

        settings.enable_border = false;
        apply_borders(&mut doc, &profile, &settings);
        assert_eq!(doc.style_rule(), None);
    }
}
