use actix_web::{web, HttpResponse};
use crate::AppState;

pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html").body(format!(
        r#"<html>

<body>
	<h1>Welcome, Chirpy Admin</h1>
	<p>Chirpy has been visited {} times!</p>
</body>

</html>
"#,
        state.hits()
    ))
}
