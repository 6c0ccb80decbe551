pub mod http_meeting_service;
