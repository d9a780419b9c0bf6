// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AnimalType, Match, MatchRow, MatchStatus, Pet, PetGender, PetWithOwner, SitterSpec, User,
    UserRef, UserRole,
};
pub use requests::{
    AnalyzeImageRequest, AvailablePetsQuery, CallerQuery, CreateMatchByUsernameRequest,
    CreateMatchRequest, CreatePetRequest, CreateSitterSpecRequest, CreateUserRequest, LoginRequest,
    PushNotificationRequest, ReceivedRequestsQuery, RespondMatchRequest, UpdatePetRequest,
    UpdateSitterSpecRequest, UpdateUserRequest,
};
pub use responses::{
    AiAnalysis, AnalyzeImageResponse, AuthResponse, CreatePetResponse, ErrorResponse,
    HealthResponse,
};
