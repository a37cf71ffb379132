use actix_files::{Files, NamedFile};
use actix_web::{web, Result};

use crate::config::ServerConfig;
use crate::connection::ws_index;

pub mod status;

/// Websocket and status routes first; everything else is a static file, falling back
/// to the index page.
pub fn configure_handlers(cfg: &mut web::ServiceConfig, static_dir: &str) {
    cfg.route("/ws/", web::get().to(ws_index))
        .route("/status", web::get().to(status::status_handler))
        .service(
            Files::new("/", static_dir)
                .index_file("index.html")
                .default_handler(web::to(index_page)),
        );
}

pub async fn index_page(config: web::Data<ServerConfig>) -> Result<NamedFile> {
    Ok(NamedFile::open(config.index_file())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use std::fs;

    fn static_dir(name: &str) -> ServerConfig {
        let dir = std::env::temp_dir().join(format!(
            "drawing-server-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("");
        fs::write(dir.join("index.html"), "<canvas></canvas>").expect("");
        fs::write(dir.join("app.js"), "draw()").expect("");
        ServerConfig::from_vars(vec![(
            "STATIC_DIR".to_string(),
            dir.to_string_lossy().into_owned(),
        )])
        .expect("")
    }

    #[actix_rt::test]
    async fn it_serves_static_files_and_falls_back_to_index() {
        let config = static_dir("files");
        let dir = config.static_dir.clone();
        let mut app = test::init_service(
            App::new()
                .data(config)
                .configure(|cfg| configure_handlers(cfg, &dir)),
        )
        .await;

        for (path, body) in &[
            ("/app.js", "draw()"),
            ("/", "<canvas></canvas>"),
            ("/rooms/42", "<canvas></canvas>"),
        ] {
            let req = test::TestRequest::get().uri(path).to_request();
            let res = test::read_response(&mut app, req).await;
            assert_eq!(&res[..], body.as_bytes(), "{}", path);
        }

        fs::remove_dir_all(&dir).expect("");
    }
}
