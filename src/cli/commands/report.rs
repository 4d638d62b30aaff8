//! Report command implementation.

use std::io::Write;

use civic_lib::geo;
use civic_lib::{Coordinates, IssueDraft, IssueType, Location};

use crate::cli::ReportArgs;
use crate::cli::session::{Session, SessionError};
use crate::output::OutputContext;

/// Resolve where the issue is: an explicit position, or the geolocator's.
fn resolve_location(args: &ReportArgs, session: &Session) -> Result<Location, SessionError> {
    let location = match (args.lat, args.lon) {
        (Some(latitude), Some(longitude)) => {
            let address = session
                .geolocator
                .reverse_geocode(Coordinates::new(latitude, longitude));
            Location::new(latitude, longitude).with_address(address)
        }
        _ => geo::locate(session.geolocator.as_ref())?,
    };
    Ok(match &args.address {
        Some(address) => location.with_address(address.clone()),
        None => location,
    })
}

/// Execute the report command.
///
/// # Errors
///
/// Returns an error if the type is unknown, no location can be determined,
/// or the store rejects the draft.
pub fn execute(
    args: &ReportArgs,
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let issue_type: IssueType = args.type_.parse()?;
    let location = resolve_location(args, session)?;

    let draft = IssueDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        issue_type,
        location,
        media: args.media.clone(),
        reported_by: session.config.user.clone(),
        ..Default::default()
    };
    let issue = session.store.create_issue(draft)?;

    ctx.emit(out, &issue, |out| {
        writeln!(out, "Reported {}: {}", issue.id, issue.title)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CivicConfig;
    use civic_lib::{CivicError, FixedGeolocator, MemoryLedger, Status};

    fn session(geo: FixedGeolocator) -> Session {
        let config = CivicConfig {
            user: "Rita".to_string(),
            seed_sample_data: false,
            ..Default::default()
        };
        Session::with_parts(config, Box::new(MemoryLedger::new()), Box::new(geo)).unwrap()
    }

    fn args(title: &str) -> ReportArgs {
        ReportArgs {
            title: title.to_string(),
            description: "Needs fixing".to_string(),
            type_: "street_light".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_report_uses_detected_location() {
        let mut s = session(FixedGeolocator::new(Coordinates::new(40.7, -74.0)).with_address("5th Ave"));
        let mut out = Vec::new();
        execute(&args("Dark corner"), &mut s, &mut out, &OutputContext::new(false)).unwrap();

        let issue = &s.store().list_all()[0];
        assert_eq!(issue.issue_type, IssueType::Streetlight);
        assert_eq!(issue.status, Status::Pending);
        assert_eq!(issue.reported_by, "Rita");
        assert_eq!(issue.location.address.as_deref(), Some("5th Ave"));
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("Reported {}: Dark corner\n", issue.id));
    }

    #[test]
    fn test_report_manual_position_when_undetectable() {
        let mut s = session(FixedGeolocator::unavailable());
        let mut manual = args("Leak");
        manual.lat = Some(-33.8688);
        manual.lon = Some(151.2093);
        let mut out = Vec::new();
        execute(&manual, &mut s, &mut out, &OutputContext::new(false)).unwrap();
        assert_eq!(
            s.store().list_all()[0].location.address.as_deref(),
            Some("33.8688°S, 151.2093°E")
        );
    }

    #[test]
    fn test_report_fails_without_location() {
        let mut s = session(FixedGeolocator::unavailable());
        let mut out = Vec::new();
        let err = execute(&args("Leak"), &mut s, &mut out, &OutputContext::new(false)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Civic(CivicError::LocationUnavailable { .. })
        ));
        assert!(s.store().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_report_rejects_blank_title() {
        let mut s = session(FixedGeolocator::new(Coordinates::new(1.0, 1.0)));
        let mut out = Vec::new();
        let err = execute(&args("   "), &mut s, &mut out, &OutputContext::new(false)).unwrap_err();
        assert!(matches!(err, SessionError::Civic(ref e) if e.is_validation()));
        assert_eq!(s.store().version(), 0);
    }

    #[test]
    fn test_report_unknown_type() {
        let mut s = session(FixedGeolocator::new(Coordinates::new(1.0, 1.0)));
        let mut bad = args("Thing");
        bad.type_ = "volcano".to_string();
        let err = execute(&bad, &mut s, &mut Vec::new(), &OutputContext::new(false)).unwrap_err();
        assert_eq!(err.to_string(), "unknown issue type 'volcano'");
    }
}
