//! Driving several devices concurrently.
//!
//! Each device gets its own session; sessions share nothing, so a failure on
//! one device never affects another.

use std::future::Future;

use futures_util::future::join_all;
use log::{info, warn};

use crate::error::Result;

/// Outcome of the job run against one device.
#[derive(Debug)]
pub struct DeviceReport<T> {
    /// Device address.
    pub host: String,

    /// What the job returned.
    pub result: Result<T>,
}

/// Run `job` once per host, all at once, and collect the outcomes.
///
/// Reports come back in the order of `hosts`.
pub async fn drive_all<I, F, Fut, T>(hosts: I, job: F) -> Vec<DeviceReport<T>>
where
    I: IntoIterator,
    I::Item: Into<String>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let jobs = hosts.into_iter().map(|host| {
        let host = host.into();
        let run = job(host.clone());
        async move {
            let result = run.await;
            match &result {
                Ok(_) => info!("{}: done", host),
                Err(e) => warn!("{}: failed: {}", host, e),
            }
            DeviceReport { host, result }
        }
    });
    join_all(jobs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::error::{Error, SessionError};
    use crate::platform::Mode;
    use crate::session::SessionBuilder;
    use crate::transport::mock::MockRouter;

    async fn configure(host: String) -> Result<Mode> {
        let secret = if host == "r3" { "wrong" } else { "class" };
        let mut session = SessionBuilder::new(host)
            .username("admin")
            .password("cisco")
            .enable_secret(secret)
            .attach(MockRouter::at_user_exec());

        session.authenticate().await?;
        session.enter_privileged().await?;
        let catalog = catalog::cisco_ios();
        session
            .apply_template(
                catalog.template("ospf")?,
                &[
                    ("process_id", "1"),
                    ("network", "10.0.0.0"),
                    ("wildcard", "0.0.0.255"),
                    ("area", "0"),
                ],
            )
            .await?;
        Ok(session.mode())
    }

    #[tokio::test]
    async fn test_drive_all_isolates_failures() {
        let reports = drive_all(["r1", "r2", "r3"], configure).await;

        let hosts: Vec<&str> = reports.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(hosts, vec!["r1", "r2", "r3"]);

        assert_eq!(reports[0].result.as_ref().ok(), Some(&Mode::PrivilegedExec));
        assert_eq!(reports[1].result.as_ref().ok(), Some(&Mode::PrivilegedExec));
        assert!(matches!(
            reports[2].result,
            Err(Error::Session(SessionError::EnableDenied { .. }))
        ));
    }
}
