pub mod websocket;

pub mod account {
    pub mod repository;
    pub mod repository_pg;
    pub mod schema;
}

pub mod access {
    pub mod service;
}

pub mod session {
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}

pub mod conversation {
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}

pub mod message {
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod schema;
    pub mod service;
}
