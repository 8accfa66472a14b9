#[rocket::launch]
fn rocket() -> _ {
    let rocket = catalog_server::rocket();
    log::info!("starting catalog server");
    rocket
}
