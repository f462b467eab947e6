pub mod battery;
pub mod route;
pub mod station;
pub mod user;

pub use battery::{
    Battery, BatteryCreate, BatteryHealth, BatteryMetrics, BatteryStatus, BatteryUpdate,
    CircularEconomyMetrics, DegradationPoint, HealthPredictionRequest, HealthPredictionResponse,
    SwapRecommendation, SwapRequest, SwapResponse,
};
pub use route::{
    ElevationPoint, OptimizationMetrics, RangeAnalysisRequest, RangeAnalysisResponse, RouteRecord,
    RouteOptimizationRequest, RouteOptimizationResponse, RouteSegment, TerrainAnalysisRequest,
    TerrainAnalysisResponse, TerrainType, WeatherCondition, WeatherData,
};
pub use station::{
    GridIntegration, Location, OperationalMetrics, Station, StationAnalytics, StationCapacity,
    StationCreate, StationPlacementRequest, StationPlacementResponse, StationSearch,
    StationSearchResult, StationStatus, StationType, StationUpdate,
};
pub use user::{
    LoginRequest, PasswordReset, PasswordResetRequest, TokenPair, User, UserCreate, UserRecord,
    UserRole,
};
