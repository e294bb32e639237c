// libs/booking-cell/src/selection.rs
use chrono::NaiveDate;
use tracing::debug;

use directory_cell::models::{Doctor, MedicalService, PrimaryService};

use crate::models::Slot;

/// Current booking selections plus the cached dependent lists.
///
/// Setters enforce the cascade: changing the doctor invalidates the
/// doctor-scoped medical services and every slot; changing the date or the
/// medical service invalidates the slots. The primary service only affects
/// pricing and never clears anything downstream. Consequently a selected
/// slot always belongs to the current doctor + date + service combination.
///
/// Fetches for the cached lists are asynchronous, so each list carries a
/// revision counter: callers capture the revision when issuing the fetch
/// and present it back in `apply_*`. A response for a superseded selection
/// no longer matches and is dropped instead of overwriting current state.
#[derive(Debug, Clone, Default)]
pub struct BookingSelection {
    doctor: Option<Doctor>,
    primary_service: Option<PrimaryService>,
    medical_service: Option<MedicalService>,
    date: Option<NaiveDate>,
    slot: Option<Slot>,
    medical_services: Vec<MedicalService>,
    slots: Vec<Slot>,
    services_revision: u64,
    slots_revision: u64,
}

/// Borrowed view of a fully specified selection, produced by
/// [`BookingSelection::complete`] once every field is present.
#[derive(Debug)]
pub struct CompleteSelection<'a> {
    pub doctor: &'a Doctor,
    pub primary_service: &'a PrimaryService,
    pub medical_service: &'a MedicalService,
    pub date: NaiveDate,
    pub slot: &'a Slot,
}

impl BookingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_doctor(&mut self, doctor: Doctor) {
        debug!("Doctor selected: {}, clearing dependent selections", doctor.id);
        self.doctor = Some(doctor);
        self.medical_service = None;
        self.slot = None;
        self.medical_services.clear();
        self.slots.clear();
        self.services_revision += 1;
        self.slots_revision += 1;
    }

    pub fn select_primary_service(&mut self, service: PrimaryService) {
        // Pricing input only; downstream selections stay valid.
        self.primary_service = Some(service);
    }

    pub fn select_medical_service(&mut self, service: MedicalService) {
        debug!("Medical service selected: {}, clearing slot", service.id);
        self.medical_service = Some(service);
        self.slot = None;
        self.slots.clear();
        self.slots_revision += 1;
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        debug!("Date selected: {}, clearing slot", date);
        self.date = Some(date);
        self.slot = None;
        self.slots.clear();
        self.slots_revision += 1;
    }

    pub fn select_slot(&mut self, slot: Slot) {
        self.slot = Some(slot);
    }

    /// Clears every selection and cache, e.g. after a confirmed booking.
    /// Revisions keep increasing so responses still in flight die stale.
    pub fn reset(&mut self) {
        debug!("Resetting booking selection");
        self.doctor = None;
        self.primary_service = None;
        self.medical_service = None;
        self.date = None;
        self.slot = None;
        self.medical_services.clear();
        self.slots.clear();
        self.services_revision += 1;
        self.slots_revision += 1;
    }

    // Revision handshake for the async list fetches.

    pub fn services_revision(&self) -> u64 {
        self.services_revision
    }

    pub fn slots_revision(&self) -> u64 {
        self.slots_revision
    }

    /// Installs a fetched medical-service list if `revision` is still
    /// current. Returns false (and drops the list) when the selection moved
    /// on while the fetch was in flight.
    pub fn apply_medical_services(&mut self, revision: u64, services: Vec<MedicalService>) -> bool {
        if revision != self.services_revision {
            debug!("Dropping stale medical-service list (revision {} != {})",
                   revision, self.services_revision);
            return false;
        }
        self.medical_services = services;
        true
    }

    /// Same contract as [`apply_medical_services`], for the slot list.
    ///
    /// [`apply_medical_services`]: Self::apply_medical_services
    pub fn apply_slots(&mut self, revision: u64, slots: Vec<Slot>) -> bool {
        if revision != self.slots_revision {
            debug!("Dropping stale slot list (revision {} != {})", revision, self.slots_revision);
            return false;
        }
        self.slots = slots;
        true
    }

    pub fn doctor(&self) -> Option<&Doctor> {
        self.doctor.as_ref()
    }

    pub fn primary_service(&self) -> Option<&PrimaryService> {
        self.primary_service.as_ref()
    }

    pub fn medical_service(&self) -> Option<&MedicalService> {
        self.medical_service.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn slot(&self) -> Option<&Slot> {
        self.slot.as_ref()
    }

    pub fn medical_services(&self) -> &[MedicalService] {
        &self.medical_services
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }

    pub fn complete(&self) -> Option<CompleteSelection<'_>> {
        Some(CompleteSelection {
            doctor: self.doctor.as_ref()?,
            primary_service: self.primary_service.as_ref()?,
            medical_service: self.medical_service.as_ref()?,
            date: self.date?,
            slot: self.slot.as_ref()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            specialization: "General Practice".to_string(),
        }
    }

    fn primary(name: &str) -> PrimaryService {
        PrimaryService {
            id: Uuid::new_v4(),
            name: name.to_string(),
            base_price: "30.00".to_string(),
        }
    }

    fn medical(doctor_id: Uuid) -> MedicalService {
        MedicalService {
            id: Uuid::new_v4(),
            doctor_id,
            name: "General Consult".to_string(),
            base_price: "100.00".to_string(),
            duration_minutes: 30,
        }
    }

    fn slot() -> Slot {
        Slot {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            start_time: "09:00:00".to_string(),
            end_time: "09:30:00".to_string(),
            is_available: true,
            date: NaiveDate::from_ymd_opt(2025, 6, 10),
        }
    }

    fn complete_selection() -> BookingSelection {
        let mut selection = BookingSelection::new();
        let doc = doctor();
        let doc_id = doc.id;
        selection.select_doctor(doc);
        selection.select_primary_service(primary("Follow Up"));
        selection.select_medical_service(medical(doc_id));
        selection.select_date(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        selection.select_slot(slot());
        selection
    }

    #[test]
    fn doctor_change_clears_service_and_slot() {
        let mut selection = complete_selection();
        assert!(selection.is_complete());

        selection.select_doctor(doctor());

        assert!(selection.medical_service().is_none());
        assert!(selection.slot().is_none());
        assert!(selection.medical_services().is_empty());
        assert!(selection.slots().is_empty());
        // Date and primary service survive a doctor change.
        assert!(selection.date().is_some());
        assert!(selection.primary_service().is_some());
    }

    #[test]
    fn date_change_clears_slot_only() {
        let mut selection = complete_selection();

        selection.select_date(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());

        assert!(selection.slot().is_none());
        assert!(selection.slots().is_empty());
        assert!(selection.medical_service().is_some());
    }

    #[test]
    fn medical_service_change_clears_slot_only() {
        let mut selection = complete_selection();
        let doc_id = selection.doctor().unwrap().id;

        selection.select_medical_service(medical(doc_id));

        assert!(selection.slot().is_none());
        assert!(selection.date().is_some());
    }

    #[test]
    fn primary_service_change_clears_nothing() {
        let mut selection = complete_selection();

        selection.select_primary_service(primary("New Patient"));

        assert!(selection.is_complete());
        assert!(selection.slot().is_some());
    }

    #[test]
    fn stale_slot_list_is_dropped() {
        let mut selection = complete_selection();
        let revision = selection.slots_revision();

        // Fetch for the old date still in flight when the date changes.
        selection.select_date(NaiveDate::from_ymd_opt(2025, 6, 12).unwrap());

        assert!(!selection.apply_slots(revision, vec![slot()]));
        assert!(selection.slots().is_empty());

        assert!(selection.apply_slots(selection.slots_revision(), vec![slot()]));
        assert_eq!(selection.slots().len(), 1);
    }

    #[test]
    fn stale_service_list_is_dropped_after_doctor_change() {
        let mut selection = BookingSelection::new();
        let first = doctor();
        let first_id = first.id;
        selection.select_doctor(first);
        let revision = selection.services_revision();

        selection.select_doctor(doctor());

        assert!(!selection.apply_medical_services(revision, vec![medical(first_id)]));
        assert!(selection.medical_services().is_empty());
    }

    #[test]
    fn incomplete_selection_is_reported() {
        let mut selection = BookingSelection::new();
        assert!(!selection.is_complete());

        selection.select_doctor(doctor());
        selection.select_date(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert!(!selection.is_complete());
    }

    #[test]
    fn reset_clears_everything_and_bumps_revisions() {
        let mut selection = complete_selection();
        let slots_revision = selection.slots_revision();

        selection.reset();

        assert!(selection.doctor().is_none());
        assert!(selection.primary_service().is_none());
        assert!(selection.slot().is_none());
        assert!(selection.slots_revision() > slots_revision);
    }
}
