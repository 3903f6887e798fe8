pub const API_NAME: &str = "[BUS-TRACKING-API]";
