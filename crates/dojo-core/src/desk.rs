//! The check-in desk.
//!
//! Drives one check-in end to end: decide the role, check the PIN, write
//! the record. Also answers the questions the kiosk screens ask of the
//! ledger (recent check-ins, a student's registrations, head-counts).

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::eligibility::{resolve_role, Role, RoleDecision};
use crate::error::{CheckinError, Result};
use crate::ledger::{CheckinLedger, CheckinRecord, CheckinRepository, ClassCounts};
use crate::roster::Student;
use crate::schedule::ClassInstance;

/// One person asking to join one class.
#[derive(Debug, Clone, Copy)]
pub struct CheckinRequest<'a> {
    pub student: &'a Student,
    pub class: &'a ClassInstance,
    /// Role picked at the kiosk, if any.
    pub role: Option<Role>,
    pub pin: &'a str,
}

/// What the success screen shows after a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDaySummary {
    pub total_classes: u32,
    pub today: usize,
    /// First word of the rank label ("Green").
    pub belt: String,
}

pub struct CheckinDesk<R: CheckinRepository> {
    ledger: CheckinLedger<R>,
}

impl<R: CheckinRepository> CheckinDesk<R> {
    pub fn new(ledger: CheckinLedger<R>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &CheckinLedger<R> {
        &self.ledger
    }

    pub fn into_ledger(self) -> CheckinLedger<R> {
        self.ledger
    }

    /// Role the student would join with, before any PIN is entered.
    pub fn decide(student: &Student, class: &ClassInstance) -> RoleDecision {
        resolve_role(&student.rank, &class.group, class.category.key())
    }

    /// Settle the role to record for a request.
    ///
    /// A picked role only matters when both are allowed; otherwise the
    /// decision stands.
    pub fn settle_role(
        decision: RoleDecision,
        requested: Option<Role>,
        student: &Student,
        class: &ClassInstance,
    ) -> Result<Role, CheckinError> {
        match (decision.default_role(), requested) {
            (None, Some(role)) => Ok(role),
            (None, None) => Err(CheckinError::RoleRequired {
                student: student.name.clone(),
                class: class.group.clone(),
            }),
            (Some(role), Some(picked)) if picked != role => {
                tracing::warn!(
                    student = %student.id,
                    class = %class.id,
                    %picked,
                    %role,
                    "requested role not allowed for this class"
                );
                Ok(role)
            }
            (Some(role), _) => Ok(role),
        }
    }

    /// Check a student into a class.
    ///
    /// # Errors
    /// [`CheckinError::RoleRequired`] when the student must pick a role,
    /// [`CheckinError::IncorrectPin`] when the PIN doesn't match, or a
    /// storage error if the ledger can't be written.
    pub fn check_in(
        &mut self,
        request: CheckinRequest<'_>,
        now: DateTime<FixedOffset>,
    ) -> Result<CheckinRecord> {
        let CheckinRequest {
            student,
            class,
            role,
            pin,
        } = request;

        let decision = Self::decide(student, class);
        let role = Self::settle_role(decision, role, student, class)?;

        if !student.verify_pin(pin) {
            return Err(CheckinError::IncorrectPin.into());
        }

        let today = now.date_naive();
        if self.ledger.is_checked_in(&class.id, &student.id, today) {
            tracing::warn!(student = %student.id, class = %class.id, "student already checked in to this class today");
        }

        let record = CheckinRecord {
            id: Uuid::new_v4().to_string(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            student_rank: student.rank.clone(),
            class_id: class.id.clone(),
            class_name: class.group.clone(),
            class_program: class.program.clone(),
            class_time: class.time.clone(),
            class_day: Some(class.day.clone()),
            role,
            timestamp: now,
        };
        self.ledger.record(record.clone())?;
        Ok(record)
    }

    /// Cancel a registration by check-in id.
    pub fn cancel(&mut self, checkin_id: &str) -> Result<CheckinRecord> {
        let record = self
            .ledger
            .find(checkin_id)
            .cloned()
            .ok_or_else(|| CheckinError::UnknownCheckin(checkin_id.to_string()))?;
        self.ledger.cancel(checkin_id)?;
        Ok(record)
    }

    /// Today's check-ins, newest first.
    pub fn recent(&self, today: NaiveDate, limit: usize) -> Vec<&CheckinRecord> {
        let mut recent = self.ledger.checkins_on(today);
        recent.truncate(limit);
        recent
    }

    pub fn registrations(&self, student_id: &str, today: NaiveDate) -> Vec<&CheckinRecord> {
        self.ledger.registrations(student_id, today)
    }

    pub fn counts(&self, class_id: &str, today: NaiveDate) -> ClassCounts {
        self.ledger.count_for(class_id, today)
    }

    pub fn summary(&self, student: &Student, today: NaiveDate) -> StudentDaySummary {
        StudentDaySummary {
            total_classes: student.total_classes,
            today: self.ledger.student_checkins_on(&student.id, today).len(),
            belt: student.rank.split(' ').next().unwrap_or_default().to_string(),
        }
    }
}
