use std::sync::Arc;
use crate::domain::ports::{
    TherapistRepository, AvailabilityRuleRepository, BlockedIntervalRepository,
    SessionTypeRepository, BookingRepository, JobRepository, EmailService,
    MeetingLinkService,
};
use crate::domain::services::{availability::AvailabilityService, reservation::ReservationService};
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub therapist_repo: Arc<dyn TherapistRepository>,
    pub rule_repo: Arc<dyn AvailabilityRuleRepository>,
    pub blocked_repo: Arc<dyn BlockedIntervalRepository>,
    pub session_type_repo: Arc<dyn SessionTypeRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub availability: Arc<AvailabilityService>,
    pub reservation: Arc<ReservationService>,
    pub email_service: Arc<dyn EmailService>,
    pub meeting_service: Arc<dyn MeetingLinkService>,
    pub templates: Arc<Tera>,
}
