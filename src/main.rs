#[rocket::launch]
fn rocket() -> _ {
    let rocket = lead_import::rocket();
    log::info!("starting lead import API server");
    rocket
}
