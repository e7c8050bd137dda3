//! The set of peripherals a door controller is assembled from.
//!
//! [`DoorDevices`] names one concrete type per collaborator so the
//! controller stays generic without a long list of type parameters.
//! [`MockDevices`] is the in-memory rig used by the tests and the
//! emulator binary.

use std::sync::Arc;
use std::time::Duration;

use doorward_biometric::{FaceClassifier, KnnFaceClassifier};
use doorward_hardware::mock::{
    MockActuator, MockActuatorProbe, MockCamera, MockCameraHandle, MockDisplay,
    MockDisplayProbe, MockFaceDetector, MockPin, MockPinProbe, MockSpeaker, MockSpeakerProbe,
    MockTokenReader, MockTokenReaderHandle,
};
use doorward_hardware::{
    Buzzer, Camera, FaceDetector, LockActuator, OutputPin, PeripheralFacade, PinBuzzer, Speaker,
    TextDisplay, TokenReader,
};

/// Shared handle to the latch, lamp and ventilation outputs.
pub type SharedFacade<Dv> =
    Arc<PeripheralFacade<<Dv as DoorDevices>::Actuator, <Dv as DoorDevices>::Pin>>;

/// Concrete peripheral types of one door installation.
pub trait DoorDevices: Send + Sync + 'static {
    type Camera: Camera + 'static;
    type Detector: FaceDetector + 'static;
    type Classifier: FaceClassifier + 'static;
    type Reader: TokenReader + 'static;
    type Actuator: LockActuator + 'static;
    type Pin: OutputPin + 'static;
    type Display: TextDisplay + 'static;
    type Buzzer: Buzzer + 'static;
    type Speaker: Speaker + 'static;
}

/// Owned peripherals handed to the controller at construction.
pub struct DoorParts<Dv: DoorDevices> {
    pub camera: Dv::Camera,
    pub detector: Dv::Detector,
    pub classifier: Dv::Classifier,
    pub reader: Dv::Reader,
    pub facade: SharedFacade<Dv>,
    pub display: Dv::Display,
    pub buzzer: Dv::Buzzer,
    pub speaker: Dv::Speaker,
}

/// In-memory peripherals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDevices;

impl DoorDevices for MockDevices {
    type Camera = MockCamera;
    type Detector = MockFaceDetector;
    type Classifier = KnnFaceClassifier;
    type Reader = MockTokenReader;
    type Actuator = MockActuator;
    type Pin = MockPin;
    type Display = MockDisplay;
    type Buzzer = PinBuzzer<MockPin>;
    type Speaker = MockSpeaker;
}

/// Handles for driving and observing a [`MockDevices`] rig.
#[derive(Clone)]
pub struct MockRig {
    pub camera: MockCameraHandle,
    pub reader: MockTokenReaderHandle,
    pub latch: MockActuatorProbe,
    pub lamp: MockPinProbe,
    pub ventilation: MockPinProbe,
    pub buzzer: MockPinProbe,
    pub display: MockDisplayProbe,
    pub speaker: MockSpeakerProbe,
}

impl MockDevices {
    /// Build a mock rig around a real classifier.
    pub fn assemble(
        classifier: KnnFaceClassifier,
        pulse: Duration,
    ) -> (DoorParts<MockDevices>, MockRig) {
        let (camera, camera_handle) = MockCamera::new();
        let (reader, reader_handle) = MockTokenReader::new();
        let (actuator, latch) = MockActuator::new();
        let (lamp, lamp_probe) = MockPin::new("lamp");
        let (ventilation, ventilation_probe) = MockPin::new("ventilation");
        let (buzzer_pin, buzzer_probe) = MockPin::new("buzzer");
        let (display, display_probe) = MockDisplay::new();
        let (speaker, speaker_probe) = MockSpeaker::new();

        let facade = PeripheralFacade::new(actuator, lamp, ventilation).with_pulse(pulse);

        let parts = DoorParts {
            camera,
            detector: MockFaceDetector::new(),
            classifier,
            reader,
            facade: Arc::new(facade),
            display,
            buzzer: PinBuzzer::new(buzzer_pin),
            speaker,
        };

        let rig = MockRig {
            camera: camera_handle,
            reader: reader_handle,
            latch,
            lamp: lamp_probe,
            ventilation: ventilation_probe,
            buzzer: buzzer_probe,
            display: display_probe,
            speaker: speaker_probe,
        };

        (parts, rig)
    }
}
