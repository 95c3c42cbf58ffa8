extern crate chrono;
extern crate clap;
extern crate ctrlc;
extern crate log;
extern crate log4rs;
extern crate rand;
extern crate serde_json;
extern crate serde_yaml;
extern crate thiserror;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use std::fs::File;
use std::io::Read;
use std::process::exit;

use clap::App;

mod clock;
mod dashboard;
mod notification;
mod page;
mod presentation;
mod random;
mod record;
mod refresher;
mod sensors;

use crate::clock::{ClockPointer, SystemClock};
use crate::notification::NotificationCenter;
use crate::presentation::{ConsolePresenter, PresenterPointer, PresenterSharedPointer};
use crate::refresher::RefresherHandle;
use crate::sensors::SensorRegistry;

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Configuration {
    notification_parameters: notification::NotificationParameters,
    dashboard_parameters: dashboard::DashboardParameters,
    sensor_parameters: sensors::SensorParameters,
}

fn main() {
    let cli_yaml = clap::load_yaml!("cli.yml");
    let matches = App::from(cli_yaml).get_matches();
    let configuration_path = matches.value_of("config").unwrap_or("resources/cropcared.yml");
    let location = matches.value_of("page").unwrap_or("index");

    match log4rs::init_file("resources/log.yml", Default::default()) {
        Ok(_) => {},
        Err(err) => {
            log::error!("Could not create logger from yaml configuration: {}", err);
            exit(-100);
        }
    };

    let mut configuration_file = match File::open(configuration_path) {
        Ok(file) => file,
        Err(err) => {
            log::error!(target: "cropcared", "Cannot open the configuration file: \'{}\'", err);
            return;
        }
    };

    let mut configuration_string = String::new();
    match configuration_file.read_to_string(&mut configuration_string) {
        Ok(_) => {},
        Err(err) => {
            log::error!(target: "cropcared", "Cannot read the configuration from file: \'{}\'", err);
            return;
        }
    };

    let configuration = match serde_yaml::from_str::<Configuration>(configuration_string.as_str()) {
        Ok(res) => res,
        Err(err) => {
            log::error!(target: "cropcared", "Cannot deserialize the configuration: \'{}\'", err);
            return;
        }
    };

    let page_kind = match page::PageKind::from_location(location) {
        Some(kind) => kind,
        None => {
            log::warn!(target: "cropcared", "Unknown page \'{}\', nothing to drive", location);
            return;
        }
    };
    log::info!(target: "cropcared", "Initializing page \'{}\'", page_kind);

    let known_fields = configuration
        .dashboard_parameters
        .fields
        .iter()
        .map(|field| field.field_id.clone())
        .collect();
    let presenter: PresenterPointer = Box::new(ConsolePresenter::new(known_fields));
    let presenter: PresenterSharedPointer = Arc::new(Mutex::new(presenter));

    let system_clock: ClockPointer = Arc::new(SystemClock);
    let notifications = NotificationCenter::new(
        Arc::clone(&presenter),
        configuration.notification_parameters.clone(),
        system_clock,
    );

    let mut handle = RefresherHandle::new();
    match page_kind {
        page::PageKind::Dashboard => {
            dashboard::start(
                &mut handle,
                Arc::clone(&presenter),
                configuration.dashboard_parameters.clone(),
            );
            // Demo flow: the host UI would trigger this from the
            // confirmed irrigation action.
            dashboard::start_irrigation(
                &mut handle,
                &notifications,
                &presenter,
                Duration::from_secs(configuration.dashboard_parameters.irrigation_delay_secs),
            );
        }
        page::PageKind::Sensors => {
            let registry = Arc::new(Mutex::new(SensorRegistry::new(
                Arc::clone(&presenter),
                notifications.clone(),
            )));
            seed_demo_sensors(&registry);
            sensors::start(&mut handle, registry, configuration.sensor_parameters.clone());
        }
        page::PageKind::Crops => {
            // Demo flow: the host UI would trigger this from the
            // notification button.
            notifications.notify_labeled("No new notifications", "info");
        }
    };

    let terminate_programm = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let terminate_main_thread = Arc::clone(&terminate_programm);

    ctrlc::set_handler(move || {
        log::info!(target: "cropcared", "Termination signal received!");
        terminate_main_thread.store(true, Ordering::SeqCst);
    }).expect("Error setting Ctrl-C handler");

    while !terminate_programm.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    handle.stop();

    log::info!(target: "cropcared", "Exiting");
    exit(0);
}

/// Seeds the registry with the sensors the mockup page ships with.
fn seed_demo_sensors(registry: &Arc<Mutex<SensorRegistry>>) {
    let mut registry = match registry.lock() {
        Ok(registry) => registry,
        Err(err) => {
            log::error!(target: "cropcared", "Sensor registry lock is poisoned: \'{}\'", err);
            return;
        }
    };
    for (id, location) in [
        ("S-01", "Field 1"),
        ("S-02", "Field 2"),
        ("S-03", "Greenhouse"),
    ]
    .iter()
    {
        match registry.add_sensor(id, location) {
            Ok(_) => {},
            Err(err) => {
                log::warn!(target: "cropcared", "Could not seed sensor \'{}\': \'{}\'", id, err)
            }
        };
    }
    log::info!(target: "cropcared", "Seeded {} demo sensors", registry.len());

    // Demo flow: the host UI would trigger this from a configure button.
    if let Some(first) = registry.records().first() {
        let id = first.id.clone();
        registry.configure_sensor(&id);
    }
}
