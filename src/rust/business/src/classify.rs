/*  ldap-auth: LDAP credential verification
 *  Copyright (C) 2024 The ldap-auth developers
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use crate::flash::{FlashConfig, FlashMessage, FlashSink};
use log::debug;

/// Turns the extended diagnostic message of a failed directory operation
/// into user-facing flash messages.
///
/// Each configured substring contained in the diagnostic contributes its
/// message. All matches are reported, in configured order. Active Directory
/// for example puts the reason for a rejected bind into a `data` field:
///
/// ```text
/// 80090308: LdapErr: DSID-0C09044E, comment: AcceptSecurityContext error, data 775, v2580
/// ```
#[derive(Clone, Debug, Default)]
pub struct ErrorClassifier {
    errors: Vec<(String, String)>,
    flash: FlashConfig,
}

impl ErrorClassifier {
    pub fn new(errors: Vec<(String, String)>, flash: FlashConfig) -> Self {
        Self { errors, flash }
    }

    pub fn classify(&self, diagnostic: Option<&str>) -> Vec<FlashMessage> {
        let diagnostic = match diagnostic {
            Some(v) if !v.is_empty() => v,
            _ => return Vec::new(),
        };
        self.errors
            .iter()
            .filter(|(needle, _)| diagnostic.contains(needle.as_str()))
            .map(|(_, message)| self.flash.message(message))
            .collect()
    }

    /// Classify and hand the result to `sink`. Nothing is written when no
    /// configured substring matches.
    pub fn report(&self, diagnostic: Option<&str>, sink: &dyn FlashSink) {
        let messages = self.classify(diagnostic);
        if messages.is_empty() {
            return;
        }
        debug!("reporting {} flash messages", messages.len());
        sink.write(&self.flash.key, messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::FlashBuffer;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    const LOCKED: &str = "80090308: LdapErr: DSID-0C09044E, comment: AcceptSecurityContext error, data 775, v2580";

    #[fixture]
    fn uut() -> ErrorClassifier {
        ErrorClassifier::new(
            vec![
                ("data 775".to_string(), "Your account is locked.".to_string()),
                ("data 532".to_string(), "Your password has expired.".to_string()),
                ("AcceptSecurityContext".to_string(), "Login failed.".to_string()),
            ],
            FlashConfig::default(),
        )
    }

    #[rstest]
    fn all_matching_substrings_are_reported_in_order(uut: ErrorClassifier) {
        let actual = uut.classify(Some(LOCKED));

        assert_eq!(
            vec!["Your account is locked.", "Login failed."],
            actual
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn messages_carry_flash_routing(uut: ErrorClassifier) {
        let actual = uut.classify(Some("data 532"));

        assert_eq!(
            vec![FlashMessage {
                message: "Your password has expired.".to_string(),
                key: "flash".to_string(),
                element: "Flash/error".to_string(),
                params: Default::default(),
            }],
            actual
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("invalid credentials"))]
    fn unmatched_diagnostic_reports_nothing(uut: ErrorClassifier, #[case] diagnostic: Option<&str>) {
        let sink = FlashBuffer::default();

        uut.report(diagnostic, &sink);

        assert!(sink.take().is_empty());
    }

    #[test]
    fn empty_table_reports_nothing() {
        let sink = FlashBuffer::default();

        ErrorClassifier::default().report(Some(LOCKED), &sink);

        assert!(sink.take().is_empty());
    }

    #[rstest]
    fn matches_are_written_under_flash_key(uut: ErrorClassifier) {
        let sink = FlashBuffer::default();

        uut.report(Some(LOCKED), &sink);

        let actual = sink.take();
        assert_eq!(vec!["flash"], actual.keys().collect::<Vec<_>>());
        assert_eq!(2, actual["flash"].len());
    }
}
