pub mod domain;
pub mod ports;
pub mod subject;

pub use domain::{Message, Role, SessionToken, Study, StudyGroup, TutorReply, User};
pub use ports::{
    PortError, PortResult, ProfileStoreService, SpeechRecognitionService,
    SpeechSynthesisService, TutorBackendService,
};
pub use subject::Subject;
