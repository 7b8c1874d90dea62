use actix_web::web::{scope, ServiceConfig};

use crate::modules::session::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/consult")
            .service(create_session)
            .service(respond)
            .service(my_sessions)
            .service(doctor_sessions)
            .service(doctor_settings)
            .service(validate_room)
            .service(complete_session),
    );
}
